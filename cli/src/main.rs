use std::{error::Error, io::Write, path::Path, str::FromStr, sync::Arc, time::Instant};

use clap::Parser;
use log::debug;
use rand::{rngs::StdRng, SeedableRng};
use rayon::prelude::*;

use rouxcube::prelude::*;

/// Length of the random scrambles
const SCRAMBLE_LENGTH: usize = 18;

/// Rubik's Cube solver using the Roux method
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Use a sequence to apply on the solved cube
	#[arg(short, default_value_t = String::new())]
	sequence: String,

	/// Set the cube from a string (the same format as when you output the cube via the "-c"-flag)
	#[arg(long, default_value_t = String::new())]
	set: String,

	/// Solve the cube (the output is one sequence per phase)
	#[arg(long, default_value_t = false)]
	solve: bool,

	/// Output length of sequence (if --solve is used)
	#[arg(short, long, default_value_t = false)]
	length: bool,

	/// Output the cube as a string rather than colored
	#[arg(short, long, default_value_t = false)]
	char_print: bool,

	/// Scramble the cube
	#[arg(short, long, default_value_t = false)]
	random: bool,

	/// Seed for the random scrambles
	#[arg(long)]
	seed: Option<u64>,

	/// Print the output to a file rather to the stdout
	#[arg(short, long, default_value_t = String::new())]
	output: String,

	/// Where the pruning tables are cached
	#[arg(long, default_value_t = String::from("data/roux.dat"))]
	data: String,

	/// Depth of the pruning tables of every phase
	#[arg(long)]
	prune_depth: Option<u8>,

	/// Merge the phases into a single sequence (if --solve is used)
	#[arg(long, default_value_t = false)]
	simplify: bool,

	/// Solve this many random scrambles in parallel and print statistics
	#[arg(long, default_value_t = 0)]
	batch: usize,
}

/// Load the tables from the cache, or generate them if there are none for this config.
fn load_data(path: &str, config: SolverConfig) -> Result<Arc<RouxData>, Box<dyn Error>> {
	match RouxData::load(path) {
		Ok(data) if data.config() == &config => return Ok(Arc::new(data)),
		Ok(_) => eprintln!("The tables in {} were made with another config", path),
		Err(e) => debug!("Could not load {}: {}", path, e),
	}

	eprintln!("Must generate tables, please wait...");
	let data = RouxData::generate(config)?;

	if let Some(dir) = Path::new(path).parent() {
		if let Err(e) = std::fs::create_dir_all(dir) {
			eprintln!("Could not create {}: {}", dir.display(), e);
		}
	}
	match data.save(path) {
		Ok(()) => eprintln!("Saved data to {}", path),
		Err(e) => eprintln!("Could not save data: {}", e),
	}

	Ok(Arc::new(data))
}

/// Solve random scrambles on all cores and report how it went
fn run_batch(
	count: usize,
	data: Arc<RouxData>,
	rng: &mut StdRng,
	out: &mut dyn Write,
) -> Result<(), Box<dyn Error>> {
	let scrambles: Vec<Vec<Turn>> = (0..count).map(|_| random_scramble(SCRAMBLE_LENGTH, rng)).collect();
	let start = Instant::now();

	let results: Vec<Result<usize, SolveError>> = scrambles
		.par_iter()
		.map(|scramble| {
			let mut cube = TrackedCube::new();
			cube.apply_turns(scramble);

			let mut solver = Solver::new(data.clone())?;
			solver.set_cube(cube);
			let plan = solver.solve()?;
			Ok(plan.len())
		})
		.collect();

	let mut lengths = vec![];
	for (scramble, res) in scrambles.iter().zip(results) {
		match res {
			Ok(len) => lengths.push(len),
			Err(e) => eprintln!("Failed to solve {}: {}", format_turns(scramble), e),
		}
	}

	writeln!(out, "Solved {}/{} cubes in {:.3}s", lengths.len(), count, start.elapsed().as_secs_f64())?;
	if let (Some(min), Some(max)) = (lengths.iter().min(), lengths.iter().max()) {
		let avg = lengths.iter().sum::<usize>() as f64 / lengths.len() as f64;
		writeln!(out, "Solution length: min {} / avg {:.2} / max {}", min, avg, max)?;
	}

	if lengths.len() != count {
		return Err(format!("Could not solve {} cubes", count - lengths.len()).into());
	}
	Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
	pretty_env_logger::init();

	let args = Args::parse();
	// Whether to redirect it to the stdout or a file
	let mut out: Box<dyn Write> = if args.output.is_empty() {
		Box::new(std::io::stdout())
	} else {
		Box::new(std::fs::File::create(&args.output)?)
	};

	let mut config = SolverConfig::default();
	if let Some(depth) = args.prune_depth {
		config = config.with_prune_depth(depth);
	}

	let mut rng = match args.seed {
		Some(seed) => StdRng::seed_from_u64(seed),
		None => StdRng::from_entropy(),
	};

	if args.batch > 0 {
		let data = load_data(&args.data, config)?;
		return run_batch(args.batch, data, &mut rng, out.as_mut());
	}

	let mut cube = TrackedCube::new();

	// Generate a random input cube
	if args.random {
		let scramble = random_scramble(SCRAMBLE_LENGTH, &mut rng);
		eprintln!("Scramble: {}", format_turns(&scramble));
		cube.apply_turns(&scramble);
	}

	// Parses a cube out of the cube string
	if !args.set.is_empty() {
		cube = match TrackedCube::from_str(&args.set) {
			Ok(c) => c,
			Err(e) => return Err(format!("Invalid cube: {}", e).into()),
		};
	}

	cube.apply_turns(&parse_turns(&args.sequence)?);

	// Solve the cube and only output the sequences
	if args.solve {
		let data = load_data(&args.data, config)?;
		let mut solver = Solver::new(data)?;
		solver.set_cube(cube);

		let plan = solver.solve()?;
		if args.simplify {
			let turns = simplify(&plan.turns());
			write!(out.as_mut(), "{}", format_turns(&turns))?;
			if args.length {
				write!(out.as_mut(), " (len={})", turns.len())?;
			}
			writeln!(out.as_mut())?;
		} else {
			writeln!(out.as_mut(), "{}", plan.notation())?;
			if args.length {
				writeln!(out.as_mut(), "(len={})", plan.len())?;
			}
		}
		return Ok(());
	}

	// Print the resulting cube (either as a string or with colors)
	if args.char_print {
		writeln!(out.as_mut(), "{}", cube.colors())?;
	} else {
		cube.colors().print();
	}

	Ok(())
}

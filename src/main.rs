//! Maze Seeker CLI - Discover a maze exit and route to it optimally.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use maze_seeker::{
    DiscoveryConfig, Maze, report,
    solver::{self, SolveReport},
};

fn print_usage(program: &str) {
    eprintln!(
        "Usage: {} <maze.txt> [config.json] [--json <report.json>] [--output <results.txt>]",
        program
    );
    eprintln!();
    eprintln!("Discover the exit of a maze with a genetic algorithm, then find");
    eprintln!("the optimal route to it with A*.");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  maze.txt       Maze file: size n, then n rows of 0/1/E/S");
    eprintln!("  config.json    Discovery configuration (default: built-in)");
    eprintln!("  --json FILE    Also write the full report as JSON");
    eprintln!("  --output FILE  Also write the text summary");
    eprintln!();
    eprintln!("Example configuration is generated with --example flag.");
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 && args[1] == "--example" {
        print_example_config();
        return;
    }

    let mut positional = Vec::new();
    let mut json_path: Option<PathBuf> = None;
    let mut output_path: Option<PathBuf> = None;
    let mut rest = args.iter().skip(1);
    while let Some(arg) = rest.next() {
        if arg == "--json" || arg == "--output" {
            let Some(path) = rest.next() else {
                eprintln!("Error: {} needs an output path", arg);
                std::process::exit(1);
            };
            let target = if arg == "--json" {
                &mut json_path
            } else {
                &mut output_path
            };
            *target = Some(PathBuf::from(path));
        } else {
            positional.push(arg.as_str());
        }
    }

    if positional.is_empty() || positional.len() > 2 {
        print_usage(&args[0]);
        std::process::exit(1);
    }

    // Load maze
    let maze_path = PathBuf::from(positional[0]);
    let maze = Maze::from_file(&maze_path).unwrap_or_else(|e| {
        eprintln!("Error loading maze {}: {}", maze_path.display(), e);
        std::process::exit(1);
    });

    // Load configuration
    let config: DiscoveryConfig = match positional.get(1) {
        Some(path) => {
            let config_str = fs::read_to_string(path).unwrap_or_else(|e| {
                eprintln!("Error reading config file: {}", e);
                std::process::exit(1);
            });
            serde_json::from_str(&config_str).unwrap_or_else(|e| {
                eprintln!("Error parsing config: {}", e);
                std::process::exit(1);
            })
        }
        None => DiscoveryConfig::default(),
    };

    println!("Maze Seeker");
    println!("===========");
    println!("Maze: {0}x{0}", maze.size());
    println!("Entrance: {}", maze.entrance());
    println!(
        "Population: {}, generations: {}, chromosome: {} genes",
        config.population_size,
        config.max_generations,
        config.chromosome_length_for(maze.size())
    );
    println!();

    let interval = config.instrumentation.verbose_interval;
    if interval > 0 {
        println!("{}", report::generation_header());
    }

    let start = Instant::now();
    let result = solver::solve_with_callback(&maze, &config, |progress| {
        if interval > 0 && (progress.generation % interval == 0 || progress.exit_found) {
            println!("{}", report::generation_row(progress));
        }
    });
    let solved: SolveReport = result.unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });
    let elapsed = start.elapsed();

    println!();
    print!("{}", report::summary(&maze, &solved));
    println!("Time: {:.2}s", elapsed.as_secs_f32());

    if let Some(path) = json_path {
        let json = serde_json::to_string_pretty(&solved).unwrap_or_else(|e| {
            eprintln!("Error serializing report: {}", e);
            std::process::exit(1);
        });
        fs::write(&path, json).unwrap_or_else(|e| {
            eprintln!("Error writing {}: {}", path.display(), e);
            std::process::exit(1);
        });
        println!("Report written to {}", path.display());
    }

    if let Some(path) = output_path {
        report::save_summary(&path, &maze, &solved).unwrap_or_else(|e| {
            eprintln!("Error writing {}: {}", path.display(), e);
            std::process::exit(1);
        });
        println!("Summary written to {}", path.display());
    }

    if !solved.is_solved() {
        std::process::exit(1);
    }
}

fn print_example_config() {
    let config = DiscoveryConfig::default();

    println!("Example configuration (config.json):");
    match serde_json::to_string_pretty(&config) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing config: {}", e),
    }
}

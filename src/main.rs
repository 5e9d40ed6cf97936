//! bonsai - plant, tend and inspect a bonsai
//!
//! Usage:
//!     bonsai plant <SPECIES> <FILE>
//!     bonsai care <FILE> <ACTION>
//!     bonsai show <FILE> [OPTIONS]
//!
//! Care actions: water, fertilize, prune, wire, advance, tick <SECS>
//!
//! Show options:
//!     --style <STYLE>     Growth style: mesh or canvas (default: mesh)
//!     --config <FILE>     Generator configuration (JSON)
//!     --json              Print the generated structure as JSON
//!     --png <OUT>         Rasterize the canvas view to a PNG
//!     --size <WxH>        PNG size in pixels (default: 480x600)
//!     --frames <N>        Re-generate N animation frames and report timing

use std::env;
use std::path::PathBuf;

use bonsai::care::{self, store, Bonsai, CareConfig};
use bonsai::core::logging;
use bonsai::core::time::FrameBudget;
use bonsai::core::Result;
use bonsai::dna::Species;
use bonsai::generation::{GeneratorConfig, GrowthStyle, StructuralGenerator, TreeShape};
use bonsai::render::{CanvasAdapter, MeshAdapter, RenderAdapter, Wind};
use bonsai::species::{SpeciesTable, StageTable};

fn print_help() {
    eprintln!("bonsai - Grow a bonsai from its DNA");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("    bonsai plant <SPECIES> <FILE>       Plant a new seed (pine, oak, maple, juniper)");
    eprintln!("    bonsai care <FILE> <ACTION>         water, fertilize, prune, wire, advance, tick <SECS>");
    eprintln!("    bonsai show <FILE> [OPTIONS]        Grow the tree and describe it");
    eprintln!();
    eprintln!("Show options:");
    eprintln!("    --style <STYLE>     Growth style: mesh or canvas (default: mesh)");
    eprintln!("    --config <FILE>     Generator configuration (JSON)");
    eprintln!("    --json              Print the generated structure as JSON");
    eprintln!("    --png <OUT>         Rasterize the canvas view to a PNG");
    eprintln!("    --size <WxH>        PNG size in pixels (default: 480x600)");
    eprintln!("    --frames <N>        Re-generate N animation frames and report timing");
    eprintln!("    -h, --help          Show this help message");
    eprintln!();
    eprintln!("Example:");
    eprintln!("    bonsai plant maple ./maple.json");
    eprintln!("    bonsai care ./maple.json tick 600");
    eprintln!("    bonsai show ./maple.json --style canvas --png maple.png");
}

#[derive(Debug)]
enum CareAction {
    Water,
    Fertilize,
    Prune,
    Wire,
    Advance,
    Tick(f64),
}

#[derive(Debug)]
struct ShowArgs {
    file: PathBuf,
    style: Option<GrowthStyle>,
    config: Option<PathBuf>,
    json: bool,
    png: Option<PathBuf>,
    size: (u32, u32),
    frames: u32,
}

#[derive(Debug)]
enum Command {
    Plant { species: Species, file: PathBuf },
    Care { file: PathBuf, action: CareAction },
    Show(ShowArgs),
}

fn parse_care_action(args: &[String]) -> std::result::Result<CareAction, String> {
    let name = args.first().ok_or("Missing care action")?;
    let action = match name.to_lowercase().as_str() {
        "water" => CareAction::Water,
        "fertilize" => CareAction::Fertilize,
        "prune" => CareAction::Prune,
        "wire" => CareAction::Wire,
        "advance" => CareAction::Advance,
        "tick" => {
            let secs = args.get(1).ok_or("Missing seconds for tick")?;
            let secs: f64 = secs.parse().map_err(|_| format!("Invalid seconds: {}", secs))?;
            if !secs.is_finite() || secs < 0.0 {
                return Err(format!("Invalid seconds: {}", secs));
            }
            CareAction::Tick(secs)
        }
        other => return Err(format!("Unknown care action: {}", other)),
    };
    Ok(action)
}

fn parse_size(value: &str) -> std::result::Result<(u32, u32), String> {
    let (w, h) = value.split_once('x').ok_or_else(|| format!("Invalid size: {}", value))?;
    let w: u32 = w.parse().map_err(|_| format!("Invalid size: {}", value))?;
    let h: u32 = h.parse().map_err(|_| format!("Invalid size: {}", value))?;
    if w == 0 || h == 0 {
        return Err(format!("Invalid size: {}", value));
    }
    Ok((w, h))
}

fn parse_show(args: &[String]) -> std::result::Result<ShowArgs, String> {
    let mut show = ShowArgs {
        file: PathBuf::new(),
        style: None,
        config: None,
        json: false,
        png: None,
        size: (480, 600),
        frames: 0,
    };
    let mut file: Option<PathBuf> = None;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--style" => {
                i += 1;
                let value = args.get(i).ok_or("Missing value for --style")?;
                show.style = Some(
                    GrowthStyle::from_name(value)
                        .ok_or_else(|| format!("Unknown style: {}. Valid styles: mesh, canvas", value))?,
                );
            }
            "--config" => {
                i += 1;
                show.config = Some(PathBuf::from(args.get(i).ok_or("Missing value for --config")?));
            }
            "--json" => show.json = true,
            "--png" => {
                i += 1;
                show.png = Some(PathBuf::from(args.get(i).ok_or("Missing value for --png")?));
            }
            "--size" => {
                i += 1;
                show.size = parse_size(args.get(i).ok_or("Missing value for --size")?)?;
            }
            "--frames" => {
                i += 1;
                let value = args.get(i).ok_or("Missing value for --frames")?;
                show.frames = value.parse().map_err(|_| format!("Invalid frame count: {}", value))?;
            }
            arg if arg.starts_with('-') => {
                return Err(format!("Unknown option: {}", arg));
            }
            path => {
                if file.is_some() {
                    return Err("Multiple tree files specified".to_string());
                }
                file = Some(PathBuf::from(path));
            }
        }
        i += 1;
    }

    show.file = file.ok_or("Missing tree file")?;
    Ok(show)
}

fn parse_args() -> std::result::Result<Command, String> {
    let args: Vec<String> = env::args().skip(1).collect();

    if args.iter().any(|a| a == "-h" || a == "--help") {
        print_help();
        std::process::exit(0);
    }

    let (command, rest) = args.split_first().ok_or("Missing command")?;
    match command.as_str() {
        "plant" => {
            let name = rest.first().ok_or("Missing species")?;
            let species = Species::from_name(name).ok_or_else(|| {
                format!("Unknown species: {}. Valid species: pine, oak, maple, juniper", name)
            })?;
            let file = rest.get(1).ok_or("Missing tree file")?;
            Ok(Command::Plant { species, file: PathBuf::from(file) })
        }
        "care" => {
            let file = rest.first().ok_or("Missing tree file")?;
            let action = parse_care_action(&rest[1..])?;
            Ok(Command::Care { file: PathBuf::from(file), action })
        }
        "show" => Ok(Command::Show(parse_show(rest)?)),
        other => Err(format!("Unknown command: {}", other)),
    }
}

fn describe(bonsai: &Bonsai, shape: &TreeShape) {
    let record = bonsai.record();
    let vitals = bonsai.vitals();
    println!("{:?} ({:?}), age {:.0}s", record.species, record.stage, record.age);
    println!("  DNA:      {}", record.dna_history().join(" "));
    println!("  Pruned:   {} times, wiring state {}", record.pruning_count, record.wiring_state);
    println!(
        "  Vitals:   health {:.0}, water {:.0}, fertilizer {:.0}",
        vitals.health, vitals.water, vitals.fertilizer
    );
    match shape.sprout() {
        Some(sprout) => println!("  Sprout:   {:.2} tall (scale {:.2})", sprout.height, sprout.scale),
        None => println!(
            "  Branches: {} nodes, depth {}/{}, {} leaf tips",
            shape.node_count(),
            shape.max_node_depth().unwrap_or(0),
            shape.max_depth,
            shape.leaf_count()
        ),
    }
    let tint = shape.leaf_tint;
    println!("  Foliage:  #{:02x}{:02x}{:02x} ({:?} style)", tint.r, tint.g, tint.b, shape.style);
}

fn show(args: ShowArgs) -> Result<()> {
    let bonsai = store::load(&args.file, CareConfig::default())?;
    let species = SpeciesTable::default();
    let stages = StageTable::default();

    let mut config = match &args.config {
        Some(path) => GeneratorConfig::load(path)?,
        None => GeneratorConfig::default(),
    };
    if let Some(style) = args.style {
        config.style = style;
    }

    let generator = StructuralGenerator::new(&config, &species);
    let shape = generator.generate(bonsai.record());
    describe(&bonsai, &shape);
    let extent = MeshAdapter::new().adapt(&shape).bounds.size();
    println!("  Extent:   {:.2} wide, {:.2} tall, {:.2} deep", extent.x, extent.y, extent.z);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&shape)?);
    }

    if let Some(out) = &args.png {
        let adapter = CanvasAdapter::new(&stages);
        let image = adapter.rasterize(&adapter.adapt(&shape), args.size.0, args.size.1);
        image.save(out)?;
        println!("Wrote {}", out.display());
    }

    if args.frames > 0 {
        // Each frame re-evaluates the record, then lays out the swaying mesh
        let mut budget = FrameBudget::default();
        let mut parts = 0;
        for frame in 0..args.frames {
            let wind = Wind::new(0.8, frame as f32 / 60.0);
            parts = budget.measure(|| {
                let shape = generator.generate(bonsai.record());
                MeshAdapter::new().with_wind(wind).adapt(&shape).parts.len()
            });
        }
        let stats = budget.stats();
        println!(
            "{} frames ({} parts): avg {:.3}ms, min {:.3}ms, max {:.3}ms, {} over the {:.1}ms budget",
            budget.total_samples(),
            parts,
            stats.avg_ms,
            stats.min_ms,
            stats.max_ms,
            stats.over_budget,
            budget.budget().as_secs_f32() * 1000.0
        );
        if !budget.within_budget() {
            log::warn!("Generation exceeded the frame budget in {} of the last {} frames", stats.over_budget, stats.samples);
        }
    }

    Ok(())
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Plant { species, file } => {
            let bonsai = Bonsai::plant(species, CareConfig::default());
            store::save(&bonsai, &file)?;
            println!(
                "Planted a {:?} seed ({}) in {}",
                species,
                bonsai.record().dna_history().join(" "),
                file.display()
            );
        }
        Command::Care { file, action } => {
            let mut bonsai = store::load(&file, CareConfig::default())?;
            match action {
                CareAction::Water => bonsai.water()?,
                CareAction::Fertilize => bonsai.fertilize()?,
                CareAction::Prune => {
                    let count = bonsai.prune()?;
                    println!("Pruned ({} cuts so far)", count);
                }
                CareAction::Wire => {
                    let state = bonsai.wire()?;
                    println!("Wiring state is now {}", state);
                }
                CareAction::Advance => {
                    let stage = bonsai.advance_stage()?;
                    println!("Grew into a {:?}", stage);
                }
                CareAction::Tick(secs) => {
                    bonsai.tick(secs, &SpeciesTable::default());
                    if !bonsai.is_alive() {
                        println!("The tree has died");
                    }
                }
            }
            store::save(&bonsai, &file)?;
            let vitals = bonsai.vitals();
            println!(
                "Health {:.0}, water {:.0}, fertilizer {:.0}",
                vitals.health, vitals.water, vitals.fertilizer
            );
        }
        Command::Show(args) => show(args)?,
    }
    Ok(())
}

fn main() {
    logging::init();

    let command = match parse_args() {
        Ok(command) => command,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            print_help();
            std::process::exit(1);
        }
    };

    if let Err(e) = run(command) {
        if matches!(e, bonsai::core::Error::Care(care::CareError::Dead)) {
            eprintln!("Nothing more can be done for this tree.");
        }
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

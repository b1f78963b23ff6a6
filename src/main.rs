//! Prism Route command-line entry point
//!
//! Loads a scene file, replays placement steps against it and prints the
//! resulting slot state and traced path as JSON. The browser build goes
//! through `platform::web` instead.

#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use std::path::PathBuf;
    use std::str::FromStr;

    use clap::{Parser, Subcommand};
    use serde::Serialize;

    use prism_route::optics::{
        Deflection, Direction, PlaceOutcome, PuzzleState, QuarterTurn, SceneLayout, SlotController,
        TracePath, reflection_table,
    };
    use prism_route::{MemoryInventory, Settings};

    #[derive(Parser)]
    #[command(name = "prism-route", version, about = "Trace light through quarter-turn prism puzzles")]
    struct Cli {
        #[command(subcommand)]
        command: Commands,
    }

    #[derive(Subcommand)]
    enum Commands {
        /// Replay steps on a scene and print state and path as JSON
        Run {
            /// Scene file (JSON)
            scene: PathBuf,
            /// Settings file (JSON); defaults apply when omitted
            #[arg(long)]
            settings: Option<PathBuf>,
            /// Element id to put in the inventory (repeatable)
            #[arg(long = "give")]
            give: Vec<String>,
            /// place:ELEMENT:SLOT, rotate:SLOT, mirror:SLOT or pickup:SLOT (repeatable)
            #[arg(long = "step")]
            steps: Vec<Step>,
            /// Pretty-print the JSON output
            #[arg(long)]
            pretty: bool,
        },
        /// Print the reflection table for every orientation
        Table,
    }

    /// One scripted controller operation
    #[derive(Debug, Clone, PartialEq)]
    enum Step {
        Place { element: String, slot: String },
        Rotate(String),
        Mirror(String),
        PickUp(String),
    }

    impl FromStr for Step {
        type Err = String;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            let parts: Vec<&str> = s.split(':').collect();
            match parts.as_slice() {
                ["place", element, slot] => Ok(Step::Place {
                    element: element.to_string(),
                    slot: slot.to_string(),
                }),
                ["rotate", slot] => Ok(Step::Rotate(slot.to_string())),
                ["mirror", slot] => Ok(Step::Mirror(slot.to_string())),
                ["pickup", slot] => Ok(Step::PickUp(slot.to_string())),
                _ => Err(format!("unrecognized step '{s}'")),
            }
        }
    }

    #[derive(Serialize)]
    struct Report<'a> {
        puzzle_id: &'a str,
        solved: bool,
        state: &'a PuzzleState,
        path: &'a TracePath,
        /// Steps the controller refused, with the reason
        rejected: Vec<String>,
    }

    pub fn run() -> Result<(), Box<dyn std::error::Error>> {
        let cli = Cli::parse();

        match cli.command {
            Commands::Run {
                scene,
                settings,
                give,
                steps,
                pretty,
            } => {
                let settings = match settings {
                    Some(path) => Settings::from_json(&std::fs::read_to_string(path)?)?,
                    None => Settings::load(),
                };
                let layout = SceneLayout::from_json(&std::fs::read_to_string(&scene)?, &settings)?;
                let mut controller =
                    SlotController::new(layout, settings, MemoryInventory::with_items(give));

                let mut rejected = Vec::new();
                for step in steps {
                    match &step {
                        Step::Place { element, slot } => {
                            if let PlaceOutcome::Rejected(reason) = controller.attempt_place(element, slot) {
                                rejected.push(format!("{step:?}: {reason}"));
                            }
                        }
                        Step::Rotate(slot) => {
                            controller.rotate(slot)?;
                        }
                        Step::Mirror(slot) => {
                            controller.mirror(slot)?;
                        }
                        Step::PickUp(slot) => {
                            controller.pick_up(slot)?;
                        }
                    }
                }

                let report = Report {
                    puzzle_id: controller.puzzle_id(),
                    solved: controller.is_solved(),
                    state: controller.state(),
                    path: controller.current_path(),
                    rejected,
                };
                let json = if pretty {
                    serde_json::to_string_pretty(&report)?
                } else {
                    serde_json::to_string(&report)?
                };
                println!("{json}");
            }
            Commands::Table => {
                for rotation in QuarterTurn::ALL {
                    for mirrored in [false, true] {
                        let row: Vec<String> = Direction::ALL
                            .into_iter()
                            .zip(reflection_table(rotation, mirrored))
                            .map(|(incoming, outcome)| match outcome {
                                Deflection::Turned(out) => format!("{incoming:?}->{out:?}"),
                                Deflection::PassThrough => format!("{incoming:?}->pass"),
                            })
                            .collect();
                        println!(
                            "{:>3}° mirrored={:<5} {}",
                            rotation.degrees(),
                            mirrored,
                            row.join("  ")
                        );
                    }
                }
            }
        }

        Ok(())
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    cli::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is platform::web::start, this is just to satisfy the compiler
}

//! CLI command definitions and handlers

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use cscope_db::{Config, InitRequest, ProjectManager, ProjectRecord};

/// cscope-db - Create, refresh and clear per-project cscope databases
#[derive(Parser)]
#[command(name = "cscope-db")]
#[command(version)]
#[command(about = "Manage cscope index databases for your projects")]
#[command(after_help = "\
EXAMPLES:
    cscope-db init                      Index the current directory
    cscope-db init -o /tmp/idx kernel   Index cwd into /tmp/idx as 'kernel'
    cscope-db init -g kernel -r ~/linux Use the 'kernel' generator
    cscope-db                           Refresh the project containing cwd
    cscope-db run kernel                Refresh a project by name
    cscope-db find                      Show the project containing cwd
    cscope-db list -g basic             Projects built with 'basic'
    cscope-db clear kernel              Delete the index and forget the project

NOTE:
    By default a generator that exits with an error still marks the project
    as updated. Set `on_generator_failure: fail` in the config file to make
    such runs fail instead.")]
pub struct Cli {
    /// Config file (default: $CSCOPE_DB_CONFIG or ~/.config/cscope-db/config.yaml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a project and generate its index
    Init {
        /// Project name (default: last segment of the root)
        name: Option<String>,

        /// Source tree to index (default: current directory)
        #[arg(short, long)]
        root: Option<PathBuf>,

        /// Directory for the index files (default: <output_dir>/<name> from the config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Generator to use (default: from config)
        #[arg(short, long)]
        generator: Option<String>,

        /// File name of the runner script (default: from config)
        #[arg(short = 'n', long)]
        runner_name: Option<String>,
    },

    /// Regenerate a project's index
    Run {
        /// Project name (default: project containing the current directory)
        name: Option<String>,
    },

    /// Delete a project's index and forget the project
    Clear {
        /// Project name (default: project containing the current directory)
        name: Option<String>,
    },

    /// Show the project containing the current directory
    Find {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List generators and projects
    List {
        /// Only show this generator and its projects
        #[arg(short, long)]
        generator: Option<String>,

        /// Only show these projects
        names: Vec<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List available generators
    ListGenerators {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the path of a generator
    GeneratorPath {
        /// Generator name
        name: String,
    },
}

/// Load config and dispatch a parsed command line
pub fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    let manager = ProjectManager::new(config);
    let cwd = std::env::current_dir().context("Could not determine current directory")?;

    match cli.command {
        Some(Commands::Init {
            name,
            root,
            output,
            generator,
            runner_name,
        }) => {
            let request = InitRequest {
                name,
                root,
                output,
                generator,
                runner_name,
            };
            cmd_init(&manager, request, &cwd)
        }
        Some(Commands::Run { name }) => cmd_run(&manager, name.as_deref(), &cwd),
        Some(Commands::Clear { name }) => cmd_clear(&manager, name.as_deref(), &cwd),
        Some(Commands::Find { json }) => cmd_find(&manager, &cwd, json),
        Some(Commands::List {
            generator,
            names,
            json,
        }) => cmd_list(&manager, generator.as_deref(), &names, json),
        Some(Commands::ListGenerators { json }) => cmd_list_generators(&manager, json),
        Some(Commands::GeneratorPath { name }) => cmd_generator_path(&manager, &name),
        None => cmd_run(&manager, None, &cwd),
    }
}

fn cmd_init(manager: &ProjectManager, request: InitRequest, cwd: &Path) -> Result<()> {
    let record = manager.init(request, cwd)?;
    println!(
        "Initialized '{}': {} -> {}",
        record.name,
        record.root.display(),
        record.output.display()
    );
    Ok(())
}

fn cmd_run(manager: &ProjectManager, name: Option<&str>, cwd: &Path) -> Result<()> {
    let record = manager.run(name, cwd)?;
    println!("Updated '{}' at {}", record.name, record.updated_at_display());
    Ok(())
}

fn cmd_clear(manager: &ProjectManager, name: Option<&str>, cwd: &Path) -> Result<()> {
    let record = manager.clear(name, cwd)?;
    println!("Cleared '{}' ({})", record.name, record.output.display());
    Ok(())
}

fn cmd_find(manager: &ProjectManager, cwd: &Path, json_output: bool) -> Result<()> {
    let record = manager.find(cwd)?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        print_record(&record);
    }
    Ok(())
}

fn cmd_list(
    manager: &ProjectManager,
    generator: Option<&str>,
    names: &[String],
    json_output: bool,
) -> Result<()> {
    let listing = manager.list(generator, names)?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    println!("Generators:");
    if listing.generators.is_empty() {
        println!("  (none in {})", manager.catalog().dir().display());
    }
    for (name, path) in &listing.generators {
        println!("  {:<20} {}", name, path.display());
    }
    println!();

    if listing.projects.is_empty() {
        println!("No projects found");
        return Ok(());
    }

    println!(
        "{:<20} {:<12} {:<20} {}",
        "NAME", "GENERATOR", "UPDATED", "ROOT -> OUTPUT"
    );
    println!("{}", "-".repeat(80));
    for record in &listing.projects {
        println!(
            "{:<20} {:<12} {:<20} {} -> {}",
            truncate(&record.name, 18),
            truncate(&record.generator, 10),
            record.updated_at_display(),
            record.root.display(),
            record.output.display()
        );
    }
    println!("\nTotal: {} projects", listing.projects.len());
    Ok(())
}

fn cmd_list_generators(manager: &ProjectManager, json_output: bool) -> Result<()> {
    let generators = manager.generators()?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&generators)?);
    } else {
        for (name, path) in &generators {
            println!("{:<20} {}", name, path.display());
        }
    }
    Ok(())
}

fn cmd_generator_path(manager: &ProjectManager, name: &str) -> Result<()> {
    println!("{}", manager.generator_path(name)?.display());
    Ok(())
}

fn print_record(record: &ProjectRecord) {
    println!("Project: {}", record.name);
    println!("  Root:      {}", record.root.display());
    println!("  Output:    {}", record.output.display());
    println!("  Generator: {}", record.generator);
    println!("  Runner:    {}", record.runner.display());
    println!("  Updated:   {}", record.updated_at_display());
}

fn truncate(value: &str, max: usize) -> String {
    if value.chars().count() > max {
        let kept: String = value.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_defaults_to_run() {
        let cli = Cli::try_parse_from(["cscope-db"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_parse_init() {
        let cli = Cli::try_parse_from([
            "cscope-db", "init", "-r", "/src", "-o", "/out", "-g", "kernel", "-n", "gen.sh", "proj",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Init {
                name,
                root,
                output,
                generator,
                runner_name,
            }) => {
                assert_eq!(name.as_deref(), Some("proj"));
                assert_eq!(root, Some(PathBuf::from("/src")));
                assert_eq!(output, Some(PathBuf::from("/out")));
                assert_eq!(generator.as_deref(), Some("kernel"));
                assert_eq!(runner_name.as_deref(), Some("gen.sh"));
            }
            _ => panic!("expected init"),
        }
    }

    #[test]
    fn test_parse_list_with_names() {
        let cli = Cli::try_parse_from(["cscope-db", "list", "-g", "basic", "a", "b"]).unwrap();
        match cli.command {
            Some(Commands::List { generator, names, json }) => {
                assert_eq!(generator.as_deref(), Some("basic"));
                assert_eq!(names, vec!["a".to_string(), "b".to_string()]);
                assert!(!json);
            }
            _ => panic!("expected list"),
        }
    }

    #[test]
    fn test_parse_list_generators() {
        let cli = Cli::try_parse_from(["cscope-db", "list-generators"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::ListGenerators { json: false })));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a-very-long-name", 8), "a-ver...");
    }
}

// SPDX-FileCopyrightText: © 2025 TTKB, LLC
// SPDX-License-Identifier: BSD-3-CLAUSE

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;
use colored::Colorize;

use seedling::logging;
use seedling::project::{self, Vars};
use seedling::report::LsColors;

fn parse_define(definition: &str) -> Result<(String, String)> {
    project::parse_define(definition)
}

/// Create a new project from a template directory.
#[derive(Debug, Parser)]
#[clap(name = env!("CARGO_CRATE_NAME"), version)]
#[command(version, about, long_about = None)]
pub struct App {
    /// the directory to copy the project from; defaults to the installed
    /// template (`../share/seedling/template` next to this executable)
    #[arg(short, long, value_name = "DIR", env = "SEEDLING_TEMPLATE")]
    template: Option<PathBuf>,

    /// value for the @APP_NAME@ variable
    #[arg(short, long, default_value = "unknown-project")]
    name: String,

    /// value for the @APP_PREFIX@ variable; defaults to APP_NAME, upper cased
    /// and with all dashes replaced by underscores
    #[arg(short, long)]
    prefix: Option<String>,

    /// value for the @APP_DESCRIPTION@ variable
    #[arg(short, long)]
    description: Option<String>,

    /// value for the @APP_AUTHOR@ variable; defaults to git's user.name
    #[arg(short, long)]
    author: Option<String>,

    /// value for the @APP_AUTHOR_EMAIL@ variable; defaults to git's user.email
    #[arg(short, long)]
    email: Option<String>,

    /// sets any other variable
    #[arg(short = 'D', long = "define", value_name = "KEY=VALUE", value_parser = parse_define)]
    defines: Vec<(String, String)>,

    /// the directory to put the project in; defaults to APP_NAME
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// replace the output directory if it is not empty
    #[clap(short, long)]
    force: bool,

    /// log what is being done
    #[clap(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = App::parse();
    logging::init(args.verbose);

    let template = match args.template {
        Some(template) => template,
        None => project::default_template()?,
    };
    if !template.is_dir() {
        bail!("template directory {} not found", template.display());
    }

    let prefix = args
        .prefix
        .unwrap_or_else(|| project::default_prefix(&args.name));
    let output = args.output.unwrap_or_else(|| PathBuf::from(&args.name));
    project::check_overlap(&template, &output)?;

    let repo = project::open_destination(&output, args.force)?;
    let author = match args.author {
        Some(author) => Some(author),
        None => repo.user_name()?,
    };
    let email = match args.email {
        Some(email) => Some(email),
        None => repo.user_email()?,
    };

    let mut vars: Vars = vec![
        ("APP_NAME".into(), Some(args.name)),
        ("APP_PREFIX".into(), Some(prefix)),
        ("APP_DESCRIPTION".into(), args.description),
        ("APP_AUTHOR".into(), author),
        ("APP_AUTHOR_EMAIL".into(), email),
    ];
    vars.extend(args.defines.into_iter().map(|(key, value)| (key, Some(value))));

    println!(
        "Creating {} from {}",
        output.display().to_string().cyan(),
        template.display().to_string().cyan()
    );
    let using = project::format_vars(&vars);
    if !using.is_empty() {
        println!("Using:");
        println!("{using}");
    }
    println!();

    // colored decides for the whole run, honoring NO_COLOR and the terminal
    let colors = colored::control::SHOULD_COLORIZE
        .should_colorize()
        .then(LsColors::from_env);
    let summary = project::copy_templates(&repo, &template, vars, colors)?;
    if let Some(warning) = project::missing_warning(&summary.missing) {
        eprintln!("{warning}");
    }

    Ok(())
}

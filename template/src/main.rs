// Copyright (c) @YEAR@ @APP_AUTHOR@
// This code is licensed under MIT license (see LICENSE for details)

use std::ffi::OsString;

use anyhow::Result;
use clap::Parser;

#[derive(Debug, Parser)]
#[command(disable_help_flag = true, disable_version_flag = true)]
struct Args {
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    #[allow(dead_code)]
    args: Vec<OsString>,
}

fn tool(_args: &Args) -> Result<()> {
    println!("Hello, {}!", "World");
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    tool(&args)
}

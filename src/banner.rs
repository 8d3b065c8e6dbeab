use std::io::{self, Write};

use colored::Colorize;

const LOGO: &str = r"
  ____                _       _
 / ___| ___ _ __ ___ (_)_ __ (_)____
| |  _ / _ \ '_ ` _ \| | '_ \| |_  /
| |_| |  __/ | | | | | | | | | |/ /
 \____|\___|_| |_| |_|_|_| |_|_/___|
";

pub fn print_banner() {
    // A closed stdout only loses the greeting.
    let _ = write_banner(&mut io::stdout());
}

pub fn write_banner<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "{}", LOGO.green().bold())?;
    writeln!(
        out,
        "{}",
        "Welcome to Geminiz, a CLI tool powered by Generative AI models 🚀".cyan()
    )?;
    writeln!(out, "{}", "Author: Fajar Dwi Utomo 🖥️".cyan())?;
    writeln!(
        out,
        "{}",
        "Use this tool to generate AI-powered responses effortlessly\n".cyan()
    )?;
    writeln!(out, "{}", "Type 'geminiz prompt' to get started\n".yellow())
}

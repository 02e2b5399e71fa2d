//! Patch listing.

#![allow(clippy::print_literal)] // Table headers use literal strings intentionally

use anyhow::Context;
use clap::Args;
use klimper_config::{paths, patches};

#[derive(Args)]
pub struct PatchesArgs {
    /// Print the TOML of a patch instead of listing
    #[arg(long, value_name = "NAME")]
    show: Option<String>,
}

pub fn run(args: PatchesArgs) -> anyhow::Result<()> {
    if let Some(name) = &args.show {
        return show(name);
    }

    println!("Built-in patches:");
    println!();
    println!("  {:10}  {:>5}  {:>6}  {}", "Name", "BPM", "Voices", "Description");
    println!("  {:10}  {:>5}  {:>6}  {}", "----", "---", "------", "-----------");
    for (id, patch) in patches::PATCH_NAMES.iter().zip(patches::builtin()) {
        println!(
            "  {:10}  {:>5}  {:>6}  {}",
            id,
            patch.sequencer.bpm,
            patch.synth.polyphony,
            patch.description.as_deref().unwrap_or("")
        );
    }

    let user = paths::list_user_patches();
    println!();
    if user.is_empty() {
        println!("No user patches in {}", paths::patches_dir().display());
    } else {
        println!("User patches ({}):", paths::patches_dir().display());
        for path in user {
            if let Some(name) = paths::patch_name_from_path(&path) {
                println!("  {}", name);
            }
        }
    }

    println!();
    println!("Use 'klimper render out.wav --patch NAME' to hear one.");
    Ok(())
}

fn show(name: &str) -> anyhow::Result<()> {
    if let Some(toml) = patches::patch_toml(name) {
        print!("{toml}");
        return Ok(());
    }
    let patch = patches::resolve(name)
        .with_context(|| format!("patch '{name}' not found"))?;
    print!("{}", patch.to_toml()?);
    Ok(())
}

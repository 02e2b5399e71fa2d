//! Parameter listing.

#![allow(clippy::print_literal)] // Table headers use literal strings intentionally

use super::common::{SoundArgs, engine_config, load_config};
use clap::Args;
use klimper_core::{ParamDescriptor, ParameterInfo};
use klimper_io::RenderEngine;

#[derive(Args)]
pub struct ParamsArgs {
    #[command(flatten)]
    sound: SoundArgs,
}

pub fn run(args: ParamsArgs) -> anyhow::Result<()> {
    let config = load_config(&args.sound)?;
    let engine = RenderEngine::new(&engine_config(&config))?;
    let control = engine.control_handle();

    println!("Parameters for '{}':", config.display_name());
    println!();
    println!(
        "  {:>2}  {:20}  {:8}  {:>10}  {:>18}  {:>6}",
        "#", "Name", "Short", "Value", "Range", "Step"
    );
    println!(
        "  {:>2}  {:20}  {:8}  {:>10}  {:>18}  {:>6}",
        "-", "----", "-----", "-----", "-----", "----"
    );

    for index in 0..control.param_count() {
        let Some(desc) = control.param_info(index) else {
            continue;
        };
        println!(
            "  {:>2}  {:20}  {:8}  {:>10}  {:>18}  {:>6}",
            index,
            desc.name,
            desc.short_name,
            format_value(&desc, control.get_param(index)),
            format!("{} .. {}", format_value(&desc, desc.min), format_value(&desc, desc.max)),
            desc.step
        );
    }
    Ok(())
}

fn format_value(desc: &ParamDescriptor, value: f32) -> String {
    if desc.step >= 1.0 {
        format!("{:.0}{}", value, desc.unit.suffix())
    } else {
        format!("{:.2}{}", value, desc.unit.suffix())
    }
}

mod cli;
mod commands;
mod context;
mod logging;
mod output;

use clap::Parser;
use cli::{Cli, Commands};
use context::Context;

fn main() {
    let cli = Cli::parse();

    let ctx = Context::new(cli.config.as_deref(), cli.verbose);
    let level = ctx
        .as_ref()
        .map(|ctx| ctx.config.log.level.as_str())
        .unwrap_or("warn");
    logging::init(cli.verbose, level);

    let result = match cli.command {
        Commands::Doctor { json } => {
            commands::doctor::run(ctx.as_ref().map_err(|e| format!("{:#}", e)), json)
        }
        command => match ctx {
            Ok(ctx) => dispatch(&ctx, command),
            Err(e) => Err(e),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn dispatch(ctx: &Context, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Fill(args) => commands::fill::run(args),
        Commands::Pdf(args) => commands::pdf::run(ctx, args),
        Commands::Convert { input, output } => commands::convert::run(ctx, input, output),
        Commands::Template(template_cmd) => commands::template::run(ctx, template_cmd),
        Commands::Doctor { json } => commands::doctor::run(Ok(ctx), json),
    }
}

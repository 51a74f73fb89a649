use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use charla_train::ForceOutcome;

use super::{describe_outcome, open_service};

#[derive(Args)]
pub struct TrainArgs {
    /// Directory holding the chat files
    #[arg(long, default_value = ".")]
    pub dir: PathBuf,
}

pub fn run(args: &TrainArgs) -> Result<()> {
    let service = open_service(&args.dir, None)?;
    match service.force_training()? {
        ForceOutcome::Busy => {
            println!("Ya hay un entrenamiento en curso.");
        }
        ForceOutcome::Started(handle) => {
            println!("Entrenamiento iniciado...");
            println!("{}", describe_outcome(&handle.join()));
            println!("Reinicia el chat para cargar el modelo actualizado.");
        }
    }
    Ok(())
}

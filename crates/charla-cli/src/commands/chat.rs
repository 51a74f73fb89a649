use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use charla_train::TrainingHandle;

use super::{describe_outcome, open_service};

#[derive(Args)]
pub struct ChatArgs {
    /// Directory holding the chat files
    #[arg(long, default_value = ".")]
    pub dir: PathBuf,

    /// Fixed RNG seed for reproducible replies
    #[arg(long)]
    pub seed: Option<u64>,
}

pub fn run(args: &ChatArgs) -> Result<()> {
    let service = open_service(&args.dir, args.seed)?;

    println!("Charla lista. Escribe 'salir' para terminar.");
    if !service.has_model() {
        println!("(sin modelo entrenado todavía; las respuestas serán genéricas)");
    }

    let stdin = io::stdin();
    let mut pending: Option<TrainingHandle> = None;

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let message = line.trim();
        if message.eq_ignore_ascii_case("salir") {
            break;
        }

        let turn = service.handle_message(message);
        println!("{}", turn.reply);

        if let Some(handle) = turn.training {
            println!("(entrenamiento iniciado en segundo plano)");
            if let Some(previous) = pending.replace(handle) {
                previous.join();
            }
        } else if let Some(handle) = pending.take() {
            if handle.is_finished() {
                println!("({})", describe_outcome(&handle.join()));
            } else {
                pending = Some(handle);
            }
        }
    }

    if let Some(handle) = pending {
        if !handle.is_finished() {
            println!("Esperando a que termine el entrenamiento...");
        }
        println!("({})", describe_outcome(&handle.join()));
    }
    println!("Hasta luego.");
    Ok(())
}

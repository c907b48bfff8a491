use anyhow::{bail, Error};
use std::io::BufRead;
use std::io::Write;
use tracing_subscriber::EnvFilter;

use kcalc::calculator::Calculator;
use kcalc::eval::{Evaluate, RemoteEvaluator};
use kcalc::keypad;
use kcalc::numeral::Numeral;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

#[tokio::main(flavor = "current_thread")]
async fn run() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut integer = false;
    let mut args = Vec::new();
    for arg in std::env::args_os().skip(1) {
        let Some(utf8_arg) = arg.to_str() else {
            bail!("Arguments contain invalid UTF-8 string");
        };
        // --int swaps in the integer keypad; everything else is key input
        if utf8_arg == "--int" {
            integer = true;
        } else {
            args.push(utf8_arg.to_owned());
        }
    }

    if integer {
        session::<i64>(args).await
    } else {
        session::<f64>(args).await
    }
}

async fn session<N: Numeral>(args: Vec<String>) -> Result<(), Error> {
    let mut calculator = Calculator::<N, _>::new(RemoteEvaluator::spawn());

    let stdout = std::io::stdout();
    let lock = stdout.lock();
    let mut w = std::io::BufWriter::new(lock);

    if !args.is_empty() {
        for arg in &args {
            for key in keypad::scan(arg)? {
                calculator.press(key).await;
            }
        }
        show(&mut w, &calculator)?;
    } else {
        let stdin = std::io::stdin();
        let reader = std::io::BufReader::new(stdin);
        let is_interactive = atty::is(atty::Stream::Stdin);

        if is_interactive {
            write!(&mut w, ">>> ")?;
            w.flush()?;
        }

        for line in reader.lines() {
            for key in keypad::scan(&line?)? {
                calculator.press(key).await;
            }

            show(&mut w, &calculator)?;
            if is_interactive {
                write!(&mut w, ">>> ")?;
                w.flush()?;
            }
        }
    }
    w.flush()?;

    Ok(())
}

// The two display regions: the trail above, the entry below
fn show<N: Numeral, E: Evaluate<N>>(
    w: &mut impl Write,
    calculator: &Calculator<N, E>,
) -> Result<(), Error> {
    let trail = calculator.trail();
    if !trail.is_empty() {
        writeln!(w, "{}", trail)?;
    }
    writeln!(w, "{}", calculator.display_text())?;
    Ok(())
}

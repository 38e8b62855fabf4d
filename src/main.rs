use std::env;
use std::io;
use std::process;

use ordtree::driver::{self, KeyKind, Variant};

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let (variant, kind) = match parse_args(&args) {
        Ok(parsed) => parsed,
        Err(err) => {
            eprintln!("{}", err);
            println!("Supported options: bst|rbt|splay");
            process::exit(1);
        }
    };

    let stdin = io::stdin();
    let stdout = io::stdout();
    if let Err(err) = driver::run(variant, kind, stdin.lock(), &mut stdout.lock()) {
        eprintln!("{}", err);
        process::exit(1);
    }
}

fn parse_args(args: &[String]) -> Result<(Variant, KeyKind), driver::Error> {
    if args.len() < 2 || args[0] != "--type" {
        return Err(driver::Error::Usage);
    }
    let variant: Variant = args[1].parse()?;

    let mut kind = KeyKind::Text;
    let mut rest = args[2..].iter();
    while let Some(arg) = rest.next() {
        if arg == "--key" {
            kind = rest.next().ok_or(driver::Error::Usage)?.parse()?;
        } else {
            log::debug!("ignoring argument {}", arg);
        }
    }
    Ok((variant, kind))
}

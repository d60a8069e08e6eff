use std::io::{stdin, stdout, Write};
use std::path::Path;

use crossterm::style::Stylize;

use stemtree::{AutoComplete, Autocompleter, SkipListIndex, TrieIndex};

const ALPHABET: &str = "abcdefghijklmnopqrstuvwxyz";
const DELTA_PATH: &str = "stemtree_deltas.bin";
const PREFIX_DEPTH: usize = 4;

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let use_lino = args.iter().any(|a| a == "--lino");
    let dictionary = args.iter().find(|a| !a.starts_with("--"));

    let mut engine = match build_engine(use_lino, dictionary.map(String::as_str)) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("could not build engine: {}", e);
            std::process::exit(1);
        }
    };

    let delta_path = Path::new(DELTA_PATH);
    if delta_path.exists() {
        if let Err(e) = engine.retrieve(delta_path) {
            eprintln!("could not replay {}: {}", DELTA_PATH, e);
        }
    }

    println!("stemtree demo. Type a stem for completions.");
    println!(":N accepts the Nth completion, +word learns, -word unlearns, exit saves and quits.");

    let mut completions: Vec<String> = Vec::new();
    loop {
        print!("\n> ");
        stdout().flush().unwrap();
        let mut input = String::new();
        if stdin().read_line(&mut input).unwrap() == 0 {
            break;
        }
        let cmd = input.trim();

        match cmd {
            "exit" => break,
            "" => continue,
            s if s.starts_with(':') => {
                let picked = s[1..]
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| completions.get(n.wrapping_sub(1)));
                match picked {
                    Some(word) => {
                        let word = word.clone();
                        match engine.accept(&word) {
                            Ok(()) => println!("accepted {}", word.as_str().green()),
                            Err(e) => println!("{}", e.to_string().red()),
                        }
                    }
                    None => println!("{}", "no such completion".red()),
                }
            }
            s if s.starts_with('+') => match engine.learn(&s[1..]) {
                Ok(()) => println!("learned {}", s[1..].green()),
                Err(e) => println!("{}", e.to_string().red()),
            },
            s if s.starts_with('-') => match engine.unlearn(&s[1..]) {
                Ok(()) => println!("unlearned {}", s[1..].green()),
                Err(e) => println!("{}", e.to_string().red()),
            },
            stem => match engine.complete(stem) {
                Ok(words) => {
                    completions = words;
                    if completions.is_empty() {
                        println!("{}", "no completions".dark_grey());
                    }
                    for (i, word) in completions.iter().enumerate() {
                        println!("  :{}: {}", i + 1, word.as_str().cyan());
                    }
                }
                Err(e) => println!("{}", e.to_string().red()),
            },
        }
    }

    println!("\nSaving deltas...");
    if let Err(e) = engine.save(delta_path) {
        eprintln!("could not save deltas: {}", e);
    } else {
        println!("Deltas saved to '{}'", DELTA_PATH);
    }
}

fn build_engine(use_lino: bool, dictionary: Option<&str>) -> stemtree::Result<Autocompleter> {
    let engine = match (use_lino, dictionary) {
        (true, Some(file)) => SkipListIndex::from_file(Path::new(file), PREFIX_DEPTH, 0, 0)?.into(),
        (true, None) => SkipListIndex::new(PREFIX_DEPTH, 0, 0)?.into(),
        (false, Some(file)) => TrieIndex::from_file(ALPHABET, Path::new(file), 0, 0)?.into(),
        (false, None) => TrieIndex::new(ALPHABET, 0, 0)?.into(),
    };
    Ok(engine)
}

use std::env;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;

use ingest::{FileExtract, ScanOutput, default_sessions_dir, extract_from_reader, scan_roots};

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() > 2 {
        eprintln!("usage: ingest_cli [<file|dir|->]");
        std::process::exit(2);
    }

    let target = args
        .get(1)
        .cloned()
        .map(PathBuf::from)
        .unwrap_or_else(default_sessions_dir);

    if target.as_os_str() == "-" {
        print_extract(&extract_from_reader(io::stdin().lock()));
    } else if target.is_dir() {
        print_scan(&scan_roots(&[target]));
    } else {
        let file = File::open(&target).unwrap_or_else(|err| {
            eprintln!("failed to open {}: {}", target.display(), err);
            std::process::exit(1);
        });
        print_extract(&extract_from_reader(BufReader::new(file)));
    }
}

fn print_extract(extract: &FileExtract) {
    println!("intervals {}", extract.intervals.len());
    for interval in &extract.intervals {
        println!(
            "  {} -> {} ({}s)",
            interval.start().to_rfc3339(),
            interval.end().to_rfc3339(),
            interval.duration_seconds()
        );
    }
    let total = extract
        .token_events
        .iter()
        .fold(0u64, |acc, event| acc.saturating_add(event.usage.total_tokens));
    println!("token_events {}", extract.token_events.len());
    println!("total_tokens {}", total);
    println!("bad_lines {}", extract.bad_lines);
    if let Some(earliest) = extract.earliest() {
        println!("earliest {}", earliest.to_rfc3339());
    }
}

fn print_scan(scan: &ScanOutput) {
    let total = scan
        .token_events
        .iter()
        .fold(0u64, |acc, event| acc.saturating_add(event.usage.total_tokens));
    println!("files_scanned {}", scan.files_scanned);
    println!("intervals {}", scan.intervals.len());
    println!("token_events {}", scan.token_events.len());
    println!("total_tokens {}", total);
    println!("bad_lines {}", scan.bad_lines);
    if let Some(earliest) = scan.earliest {
        println!("earliest {}", earliest.to_rfc3339());
    }
}

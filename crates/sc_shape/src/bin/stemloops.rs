//! Report the stem-loops of a dot-bracket structure.
//!
//! Usage: stemloops <dot-bracket> [reactivity file] [config.json]
//!
//! With a reactivity file (whitespace or comma separated, `NULL` for
//! missing values), every stem-loop is scored against the profile.

use itertools::Itertools;
use sc_structure::find_bulges_and_interior_loops;
use sc_structure::find_stem_loops;
use sc_structure::trim_stem;
use sc_shape::ScanConfig;
use sc_shape::parse_reactivities;
use sc_shape::score_breakdown;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let Some(dot) = args.next() else {
        eprintln!("Usage: stemloops <dot-bracket> [reactivity file] [config.json]");
        std::process::exit(2);
    };
    let values = match args.next() {
        Some(path) => Some(parse_reactivities(&std::fs::read_to_string(path)?)?),
        None => None,
    };
    let config = match args.next() {
        Some(path) => ScanConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => ScanConfig::default(),
    };

    let stem_loops = find_stem_loops(&dot, config.max_loop_len, config.max_stem_gap, config.min_stem_len)?;
    println!("{} stem-loops.", stem_loops.len());
    for stem_loop in &stem_loops {
        let Some(stem) = trim_stem(&dot, stem_loop, config.min_fix_stem_len)? else {
            println!("{stem_loop} -- no helix of {} bp.", config.min_fix_stem_len);
            continue;
        };
        let loops = find_bulges_and_interior_loops(&dot, &stem)?;
        println!("{stem} {}", stem.slice(&dot)?);
        println!("  bulges:         {}", loops.bulges.iter()
            .map(|b| format!("({},{},{},{})", b.left_start, b.left_end, b.right_start, b.right_end))
            .join(" "));
        println!("  interior loops: {}", loops.interior_loops.iter()
            .map(|l| format!("({},{})", l.start, l.end))
            .join(" "));
        if let Some(values) = &values {
            match score_breakdown(&dot, values, &stem, &config.params) {
                Ok(bd) => println!("  score:          {:.3}\n{bd}", bd.score()),
                Err(e) => println!("  score:          n/a ({e})"),
            }
        }
    }
    Ok(())
}

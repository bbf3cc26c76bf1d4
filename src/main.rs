//! # pagefit CLI
//!
//! Usage:
//!   pagefit job.json -o layout.json
//!   echo '{ ... }' | pagefit --svg preview/
//!   pagefit --example > job.json
//!
//! Set `RUST_LOG=debug` to see page-break decisions.

use std::env;
use std::fs;
use std::io::{self, Read};
use std::path::Path;
use std::process::ExitCode;

use pagefit::sink::SvgPreview;

fn main() -> ExitCode {
    env_logger::init();
    let args: Vec<String> = env::args().collect();

    // Handle --example flag
    if args.iter().any(|a| a == "--example") {
        print!("{}", example_workbook_json());
        return ExitCode::SUCCESS;
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("✗ {}", message);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> Result<(), String> {
    // Read input
    let input = if args.len() > 1 && !args[1].starts_with('-') {
        fs::read_to_string(&args[1]).map_err(|e| format!("Failed to read {}: {}", args[1], e))?
    } else {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| format!("Failed to read stdin: {}", e))?;
        buf
    };

    let flag_value = |flag: &str| {
        args.windows(2)
            .find(|w| w[0] == flag)
            .map(|w| w[1].clone())
    };
    let output_path = flag_value("-o");
    let svg_dir = flag_value("--svg");

    let layout = pagefit::layout_job_json(&input).map_err(|e| e.to_string())?;
    for notice in &layout.notices {
        eprintln!("! {:?}", notice);
    }

    let json = serde_json::to_string_pretty(&layout)
        .map_err(|e| format!("Failed to serialize layout: {}", e))?;
    match &output_path {
        Some(path) => {
            fs::write(path, &json).map_err(|e| format!("Failed to write {}: {}", path, e))?;
            eprintln!("✓ Written {} page(s) to {}", layout.page_count(), path);
        }
        None => println!("{}", json),
    }

    if let Some(dir) = svg_dir {
        let dir = Path::new(&dir);
        fs::create_dir_all(dir)
            .map_err(|e| format!("Failed to create {}: {}", dir.display(), e))?;
        let svgs = SvgPreview::render(&layout.pages);
        for (i, svg) in svgs.iter().enumerate() {
            let path = dir.join(format!("page-{:03}.svg", i + 1));
            fs::write(&path, svg)
                .map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;
        }
        eprintln!("✓ Written {} SVG preview(s) to {}", svgs.len(), dir.display());
    }

    Ok(())
}

fn example_workbook_json() -> &'static str {
    r##"{
  "type": "workbook",
  "page": { "size": "a4", "orientation": "landscape", "margin": 10 },
  "typography": {
    "font": { "fontSize": 4.2, "lineHeightFactor": 1.15 },
    "hyphenate": true,
    "lang": "en"
  },
  "grid": {
    "columns": { "policy": "content", "minWidth": 12 },
    "cellPadding": 1,
    "cellBorder": { "style": "solid", "color": "#c0c0c0", "strokeWidth": 0.2 },
    "overflow": "place"
  },
  "sheets": [
    {
      "name": "Invoices",
      "rows": [
        ["Invoice", "Customer", "Description", "Amount"],
        ["INV-001", "Widget Industries", "Quarterly maintenance of the production line", "1,250.00"],
        ["INV-002", "Acme Corp", "Consulting", "480.00"],
        ["INV-003", "Globex", "Replacement parts, expedited shipping", "2,915.40"]
      ]
    },
    { "name": "Notes", "rows": [] }
  ]
}
"##
}

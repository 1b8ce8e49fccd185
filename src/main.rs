use mat5_reader::MatFile;
use std::env;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <path-to-mat-file>", args[0]);
        std::process::exit(1);
    }

    let mat_path = &args[1];
    println!("Reading MAT-file: {}", mat_path);
    println!("{}", "=".repeat(60));

    match MatFile::open(mat_path) {
        Ok(mat) => {
            let header = mat.header();
            println!("\nHeader:");
            println!("  Description: {}", header.description());
            println!("  Version: {:?}", header.version);
            println!("  Byte order: {:?} (same as host: {})", header.byte_order, header.is_same_endian());

            println!("\nVariables ({}):", mat.len());
            for line in mat.describe().lines() {
                println!("  {}", line);
            }

            for (name, array) in mat.iter() {
                if let Some(text) = array.as_matrix().and_then(|m| m.as_string()) {
                    println!("\n{} = '{}'", name, text);
                }
            }
        }
        Err(e) => {
            eprintln!("\nERROR: Failed to read MAT-file");
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    }
}

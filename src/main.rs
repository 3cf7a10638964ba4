use molrules::core::checks::NetworkChecker;
use molrules::core::loader;

fn main() {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "network_data/network.json".to_string());

    let network = match loader::load(&path) {
        Ok(network) => network,
        Err(err) => {
            eprintln!("failed to load {}: {}", path, err);
            std::process::exit(1);
        }
    };

    NetworkChecker::all_checks(&network);

    let containers = match loader::compile_network(&network) {
        Ok(containers) => containers,
        Err(err) => {
            eprintln!("compilation failed: {}", err);
            std::process::exit(1);
        }
    };

    for container in &containers {
        println!("{} ({} reactions)", container.name, container.len());
        for reaction in container.iter() {
            println!("  {}", reaction);
        }
    }
}

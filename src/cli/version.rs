/// Display version information
pub fn execute() {
    println!("nipopow-spv {}", env!("CARGO_PKG_VERSION"));
    println!("NiPoPoW light client verifier");
    println!(
        "Defaults: m = {}, k = {}",
        nipopow_spv::nipopow::DEFAULT_M,
        nipopow_spv::nipopow::DEFAULT_K
    );
}

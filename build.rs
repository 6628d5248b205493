use clap::CommandFactory;

// Include the CLI definition
include!("src/cli.rs");

fn main() -> std::io::Result<()> {
    println!("cargo:rerun-if-changed=src/cli.rs");

    let Some(out_dir) = std::env::var_os("OUT_DIR").map(PathBuf::from) else {
        return Ok(());
    };

    let man = clap_mangen::Man::new(Cli::command());
    let mut buffer: Vec<u8> = Default::default();

    // Render the man page
    man.render(&mut buffer)?;

    std::fs::write(out_dir.join("kondex.1"), buffer)?;

    Ok(())
}

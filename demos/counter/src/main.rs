use tally_core::{SchedulerConfig, component_count, configure};
use tally_ui::*;

fn run(name: &str, view: fn() -> View, button: &str, clicks: usize) -> anyhow::Result<()> {
    let host = Host::mount(name, view);
    println!("== {name}");
    println!("{}", host.lines().join("  "));
    for _ in 0..clicks {
        host.click(button)?;
        println!("{}", host.lines().join("  "));
    }
    log::info!("{name}: {} renders", host.render_count());
    host.unmount();
    log::debug!("{name} unmounted; {} live components", component_count());
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    configure(SchedulerConfig::default());

    let clicks = match std::env::args().nth(1) {
        Some(arg) => arg.parse::<usize>()?,
        None => 3,
    };

    run("counter", Counter, "Click me", clicks)?;
    run("stale", StaleCounter, "+2", clicks)?;
    run("double", DoubleCounter, "+2", clicks)?;
    Ok(())
}

use anyhow::{Context, Result, anyhow};
use temp_kit::{Location, Registry, ResourceKind, TempResource};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .init();

    let tmp = std::env::temp_dir();
    println!("Temp dir: {}", tmp.display());

    // every resource created below belongs to `registry`
    // and will be removed when it goes out of scope
    let mut registry = Registry::new();
    registry.set_prefix("tour-");

    let workspace = registry.add_element(ResourceKind::Directory, Location::Generated)?;
    let notes = registry.add_file()?;

    let file = registry
        .get_mut(notes)
        .and_then(|r| r.as_file_mut())
        .ok_or_else(|| anyhow!("notes is not a tracked file"))?;
    file.append_text("hello")?;
    println!("notes: {:?}", file.read_text()?);

    // move the notes into the workspace directory
    let target = registry
        .get(workspace)
        .map(|r| r.path().join("notes.txt"))
        .ok_or_else(|| anyhow!("workspace is not tracked"))?;
    registry
        .move_element_to(notes, &target)
        .with_context(|| format!("moving notes to {}", target.display()))?;

    for (id, resource) in registry.iter() {
        println!("{} {:?} {}", id, resource.kind(), resource.path().display());
    }

    // a resource destroyed directly is swept from the bookkeeping
    let scratch = registry.add_file()?;
    if let Some(resource) = registry.get_mut(scratch) {
        resource.destroy()?;
    }
    println!("swept {} destroyed resource(s)", registry.remove_destroyed());

    let report = registry.dispose();
    println!("{}", report);
    report.into_result()?;

    Ok(())
}

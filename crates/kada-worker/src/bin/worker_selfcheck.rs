use std::path::Path;

use kada_worker::WorkerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = WorkerConfig::from_env();

    println!(
        "worker-selfcheck: starting with work_dir={}",
        config.work_dir.display()
    );
    ensure_workdir(&config.work_dir).await?;
    ensure_tool("ffmpeg", kada_media::check_ffmpeg())?;
    ensure_tool("ffprobe", kada_media::check_ffprobe())?;
    ensure_env_present(&["QUEUE_URL", "EVENT_BUS_NAME", "DYNAMODB_TABLE"])?;

    println!("worker-selfcheck: ok");
    Ok(())
}

async fn ensure_workdir<P: AsRef<Path>>(path: P) -> anyhow::Result<()> {
    let path = path.as_ref();
    tokio::fs::create_dir_all(path).await?;
    tempfile::tempfile_in(path)
        .map_err(|e| anyhow::anyhow!("work dir {} not writable: {}", path.display(), e))?;
    Ok(())
}

fn ensure_tool(name: &str, found: kada_media::MediaResult<std::path::PathBuf>) -> anyhow::Result<()> {
    let path = found.map_err(|e| anyhow::anyhow!("{} not available: {}", name, e))?;
    println!("worker-selfcheck: {} at {}", name, path.display());
    Ok(())
}

fn ensure_env_present(vars: &[&str]) -> anyhow::Result<()> {
    for var in vars {
        if std::env::var(var).is_err() {
            return Err(anyhow::anyhow!("missing required env var {}", var));
        }
    }
    Ok(())
}

use std::path::Path;

use anyhow::{bail, Result};
use novel_digest::{logger, App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    logger::init();

    // 加载配置
    let config = match std::env::var("NOVEL_DIGEST_CONFIG") {
        Ok(path) => Config::from_toml_file(Path::new(&path))?,
        Err(_) => Config::from_env(),
    };

    let mut args = std::env::args().skip(1);
    let (stage, name) = match (args.next(), args.next()) {
        (Some(stage), Some(name)) => (stage, name),
        _ => bail!("用法: novel_digest <split|read|retry|outline> <小说名>"),
    };

    let app = App::with_llm(config)?;

    match stage.as_str() {
        "split" => {
            app.split(&name)?;
        }
        "read" => {
            app.read(&name).await?;
        }
        "retry" => {
            app.retry(&name).await?;
        }
        "outline" => {
            app.outline(&name).await?;
        }
        other => bail!("未知阶段: {}", other),
    }

    Ok(())
}

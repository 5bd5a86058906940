// WebSSH - WebSocket 到 SSH 的终端中继
// 应用入口

mod cli;
mod constants;
mod gateway;
mod i18n;
mod models;
mod protocol;
mod services;
mod ssh;
mod terminal;

use anyhow::{anyhow, bail, Result};
use clap::Parser;
use tracing::{info, warn};

use cli::{Cli, Commands, ConnectArgs, ProfileCommand, ServeArgs};
use models::AppSettings;
use services::storage::{self, ProfileStore};
use terminal::{ConnectionForm, StdioTerminal, TerminalBridge, TerminalWidget, WsConnector};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // 终端会话中日志会和 shell 输出混在一起，默认只保留警告
    let level = match (&cli.command, cli.verbose) {
        (_, 2..) => tracing::Level::DEBUG,
        (_, 1) => tracing::Level::INFO,
        (Commands::Serve(_), _) => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };
    // 可以通过 RUST_LOG 环境变量控制日志级别，例如：RUST_LOG=debug webssh serve
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_target(false) // 不显示 target（模块路径）
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    // 优先级：命令行 > 环境变量 > 设置文件 > 默认值
    let mut settings = storage::load_settings(cli.config.as_deref())?;
    settings.apply_env();

    match cli.command {
        Commands::Serve(args) => serve(settings, args).await,
        Commands::Connect(args) => connect(settings, args).await,
        Commands::Profile(command) => profile(command),
    }
}

async fn serve(mut settings: AppSettings, args: ServeArgs) -> Result<()> {
    if let Some(host) = args.host {
        settings.server.host = host;
    }
    if let Some(port) = args.port {
        settings.server.port = port;
    }
    if let Some(dir) = args.static_dir {
        settings.server.static_dir = dir.to_string_lossy().into_owned();
    }
    gateway::serve(settings).await
}

async fn connect(mut settings: AppSettings, args: ConnectArgs) -> Result<()> {
    if let Some(url) = args.url {
        settings.client.url = url;
    }

    let store = ProfileStore::open_default()?;
    let mut form = match &args.profile {
        Some(name) => match store.get(name)? {
            Some(profile) => ConnectionForm::from(&profile),
            None => bail!("Unknown profile: {}", name),
        },
        None => ConnectionForm::default(),
    };
    args.form.apply(&mut form)?;
    // 在进入原始模式之前校验，错误信息能正常显示
    form.validate()
        .map_err(|e| anyhow!("{} ({})", i18n::t(&settings.language, "client.required_fields"), e))?;

    let (mut terminal, mut quit) = StdioTerminal::start()?;
    // 远端 shell 退出后中继保持 WebSocket 打开，需要用户自行退出
    terminal.notify(i18n::t(&settings.language, "client.quit_hint"));
    let mut bridge = TerminalBridge::new(terminal, WsConnector, &settings.client, settings.language);
    bridge.connect(&form)?;

    if let Some(name) = &args.profile {
        if let Err(e) = store.touch_last_connected(name) {
            warn!("[Profile] Failed to update last connection time: {:#}", e);
        }
    }

    while bridge.is_active() {
        tokio::select! {
            msg = bridge.next_event() => match msg {
                Some(msg) => bridge.handle(msg),
                None => break,
            },
            _ = quit.recv() => {
                info!("[Bridge] Local terminal closed");
                break;
            }
        }
    }

    bridge.dispose();
    Ok(())
}

fn profile(command: ProfileCommand) -> Result<()> {
    let store = ProfileStore::open_default()?;

    match command {
        ProfileCommand::List => {
            let config = store.load()?;
            if config.profiles.is_empty() {
                println!("No saved profiles ({})", store.path().display());
            }
            for p in &config.profiles {
                println!(
                    "{:<16} {}@{}:{} [{:?}] last used: {}",
                    p.name,
                    p.username,
                    p.host,
                    p.port,
                    p.auth_type,
                    p.last_connected_at.as_deref().unwrap_or("never")
                );
            }
        }
        ProfileCommand::Show { name } => {
            let Some(mut p) = store.get(&name)? else {
                bail!("Unknown profile: {}", name);
            };
            let mask = |s: &mut Option<String>| {
                if s.is_some() {
                    *s = Some("********".to_string());
                }
            };
            mask(&mut p.password);
            mask(&mut p.private_key);
            mask(&mut p.passphrase);
            println!("{}", serde_json::to_string_pretty(&p)?);
        }
        ProfileCommand::Save { name, form: args } => {
            let mut form = match store.get(&name)? {
                Some(existing) => ConnectionForm::from(&existing),
                None => ConnectionForm::default(),
            };
            args.apply(&mut form)?;
            form.validate()?;
            let replaced = store.upsert(form.to_profile(&name))?;
            println!(
                "{} profile {}",
                if replaced { "Updated" } else { "Saved" },
                name
            );
        }
        ProfileCommand::Delete { name } => {
            if !store.delete(&name)? {
                bail!("Unknown profile: {}", name);
            }
            println!("Deleted profile {}", name);
        }
    }
    Ok(())
}

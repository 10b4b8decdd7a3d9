use floor_server::{Config, Server, ServerState, init_logger_with_file};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. 环境变量 (.env 可选)
    dotenv::dotenv().ok();

    // 2. 日志先就位，配置加载时的 JWT 密钥告警才不会丢
    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok();
    init_logger_with_file(log_level.as_deref(), log_dir.as_deref());

    // 3. 加载配置
    let config = Config::from_env();
    tracing::info!(environment = %config.environment, "Floor server starting...");

    // 4. 初始化服务器状态
    let state = ServerState::initialize(&config);

    // 5. 启动 HTTP 服务器
    let server = Server::with_state(config, state);
    server.run().await
}

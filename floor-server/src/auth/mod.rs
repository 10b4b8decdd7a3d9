//! 认证模块
//!
//! JWT 的生成与验证，以及 HTTP 层的 [`CurrentUser`] 提取器。
//! 密码校验和登录流程由上游认证服务负责，这里只消费令牌。

mod extractor;
mod jwt;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};

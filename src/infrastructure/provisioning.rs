//! 本番機能プロビジョニングの実装
//!
//! apt によるパッケージ導入、nginx サイト設定、certbot による証明書発行、
//! cron.d への定期ジョブ登録、systemd による常駐サービス管理、
//! 埋め込みスクリプトのインストールを提供します。

mod apt_package_manager;
mod certbot_provisioner;
mod cron_d_scheduler;
mod embedded_script_installer;
mod managed_file;
mod nginx_proxy_manager;
mod systemd_supervisor;

// 公開APIの再エクスポート
pub use apt_package_manager::AptPackageManager;
pub use certbot_provisioner::CertbotProvisioner;
pub use cron_d_scheduler::CronDScheduler;
pub use embedded_script_installer::EmbeddedScriptInstaller;
pub use managed_file::write_managed_file;
pub use nginx_proxy_manager::{NginxProxyManager, SITE_NAME};
pub use systemd_supervisor::SystemdSupervisor;

//! 本番機能プロビジョニングドメイン
//!
//! TLS終端付きリバースプロキシ、定期バックアップ、システム監視という
//! ベースデプロイに重ねて導入する本番機能を表現します。
//! 各機能は「状態を保証する」形で冪等にインストールされます。

pub mod entities;
pub mod repositories;

// 主要な型の再エクスポート
pub use entities::{
    EnsureOutcome, Feature, FeatureSelection, InstalledFeature, ProvisionReport, ScheduledTask,
    ScriptAsset, SupervisedService, TlsTarget, validate_domain, validate_email,
};
pub use repositories::{
    CertificateProvisioner, PackageManager, ProvisionError, ReverseProxyManager, ScriptInstaller,
    ServiceSupervisor, TaskScheduler,
};

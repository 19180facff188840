use common::env_config::GuardConfig;
use middleware::gate::ProtectionGate;

pub mod middleware {
    pub mod gate;
}

pub mod services {
    pub mod decision_client;
}

pub fn middleware(config: GuardConfig) -> ProtectionGate {
    ProtectionGate::new(config)
}

use biosimi::engine::config::CompositionPolicy;

pub struct DefaultsConfig {
    pub policy: CompositionPolicy,
    pub combine_by_name: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            policy: CompositionPolicy::default(),
            combine_by_name: true,
        }
    }
}

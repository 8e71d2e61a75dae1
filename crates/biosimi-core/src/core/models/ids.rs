use slotmap::new_key_type;

new_key_type! {
    pub struct CompartmentKey;
    pub struct SpeciesKey;
    pub struct ParameterKey;
    pub struct ReactionKey;
}

use slotmap::new_key_type;

new_key_type! {
    /// Identifies a shaft element registered with the engine.
    pub struct ElementId;

    /// Identifies a shaft network (one maximal connected component).
    pub struct NetworkId;
}

quantity!(TonnesCo2, "tCO₂");

quantity!(KilotonnesCo2, "ktCO₂");

impl From<TonnesCo2> for KilotonnesCo2 {
    fn from(tonnes: TonnesCo2) -> Self {
        Self(tonnes.0 * 0.001)
    }
}

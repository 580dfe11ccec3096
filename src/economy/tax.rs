/// Tax taken from the currency a player shop owner earns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaxConfig {
    /// Percentage in `[0, 100]`; clamped by settings validation
    pub rate: u32,
    pub round_up: bool,
}

impl TaxConfig {
    pub fn apply(&self, gross_price: u32) -> u32 {
        apply_tax(gross_price, self.rate, self.round_up)
    }
}

/// `net = floor_or_ceil(gross * (100 - rate) / 100)`
pub fn apply_tax(gross_price: u32, tax_rate: u32, round_up: bool) -> u32 {
    let scaled = u64::from(gross_price) * u64::from(100 - tax_rate.min(100));
    let net = if round_up { scaled.div_ceil(100) } else { scaled / 100 };
    net as u32
}

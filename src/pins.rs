use ambassador::delegatable_trait;

/// Boundary outputs of the transceiver.
#[delegatable_trait]
pub trait Pins {
    fn busy(&self) -> bool;
    fn tx(&self) -> bool;
    fn data_out(&self) -> u8;
    fn valid(&self) -> bool;
}

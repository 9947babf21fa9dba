use rand::RngCore;

/// Supplies the values workers push.
pub trait PayloadSource {
    fn next_payload(&mut self) -> u32;
}

impl<R: RngCore> PayloadSource for R {
    #[inline]
    fn next_payload(&mut self) -> u32 {
        self.next_u32()
    }
}

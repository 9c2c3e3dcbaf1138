use std::ops::Deref;

/// A view of a store's samples as plain bytes, for hashing, checksums or handing off to I/O.
pub trait IntoRawBytes<'a> {
    type Output: Deref<Target = [u8]>;

    fn into_raw_bytes(&'a self) -> Self::Output;
}

impl<'a, T> IntoRawBytes<'a> for [T]
where
    T: bytemuck::Pod,
{
    type Output = &'a [u8];

    #[inline]
    fn into_raw_bytes(&'a self) -> Self::Output {
        bytemuck::cast_slice(self)
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝

pub mod arraybuffer;
pub mod codec;
pub mod dataview;
pub mod typedarray;
pub mod view;

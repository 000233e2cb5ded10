//! Integration tests for the wallet authorization layer, driven end-to-end
//! against a programmable mock provider.


mod approval;
mod assets;

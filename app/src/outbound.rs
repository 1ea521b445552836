pub mod magic_home;

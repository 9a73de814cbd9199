pub mod ignore;
pub mod range;

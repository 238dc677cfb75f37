// Models module

pub mod post;

pub use post::{NewPost, Post, PostRequest, PostResponse};

pub mod gem_server;

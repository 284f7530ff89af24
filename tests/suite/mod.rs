mod consumers;
mod demo;

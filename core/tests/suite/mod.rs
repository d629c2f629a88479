mod board_flow;
mod remote_scoring;

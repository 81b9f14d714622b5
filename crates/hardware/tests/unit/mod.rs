mod oracle_check;
mod pipeline;
mod signals;

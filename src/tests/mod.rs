#[cfg(test)]
mod aggregator_test;
#[cfg(test)]
mod output_test;
#[cfg(test)]
mod protocol_test;

//! Fixed per-intent prompt templates, fallback answers, and follow-up
//! actions. None of this is configurable at runtime.

use servebot_core::types::Intent;

/// System prompt framing the generation backend per intent.
pub fn system_prompt(intent: Intent) -> &'static str {
    match intent {
        Intent::Careers => {
            "You are a helpful career counselor for Servecure, a home services platform. \
             You help people find job opportunities and provide information about careers \
             at the company.\n\n\
             When discussing jobs:\n\
             - Provide specific job details if available (title, department, location, salary, requirements)\n\
             - Mention relevant skills and experience when asked about requirements\n\
             - Suggest how users can apply or get more information\n\
             - Be encouraging and professional\n\
             - If you don't have specific job information, point them to the careers page or HR\n\n\
             Context information about available jobs and the company:"
        }
        Intent::Services => {
            "You are a helpful customer service representative for Servecure, a home \
             services platform. You help customers understand services, pricing, and \
             booking.\n\n\
             When discussing services:\n\
             - Provide clear information about available services\n\
             - Mention pricing when available\n\
             - Explain the booking process\n\
             - Highlight quality and reliability\n\
             - If specific details aren't available, guide them to support or the booking system\n\n\
             Context information about services:"
        }
        Intent::General => {
            "You are a helpful assistant for Servecure, a home services platform. You \
             provide general information about the company, how it works, and help users \
             navigate the platform.\n\n\
             When answering general questions:\n\
             - Be informative and friendly\n\
             - Explain how Servecure works\n\
             - Highlight key features and benefits\n\
             - Point users to the relevant part of the website when appropriate\n\
             - If you don't have specific information, suggest contacting customer support\n\n\
             Context information about the company:"
        }
    }
}

/// Canned answer used when the generation backend is unavailable. Reads as a
/// reasonable response with representative catalog content, never as an
/// error message.
pub fn fallback_response(intent: Intent) -> &'static str {
    match intent {
        Intent::Careers => {
            "Thank you for your interest in careers at Servecure! We have opportunities \
             across Engineering, Product, Design, Marketing, and other departments. \
             Please visit our careers page to see current openings and apply. For \
             questions about a specific position, you can reach out to our HR team."
        }
        Intent::Services => {
            "Servecure offers professional home services including:\n\n\
             • Electrician services (starting from ₹299)\n\
             • Plumber services (starting from ₹399)\n\
             • Painter services (starting from ₹499)\n\
             • Carpenter services (starting from ₹349)\n\
             • House cleaning (starting from ₹199)\n\
             • AC services (starting from ₹449)\n\n\
             To book a service, browse our services, pick a time that suits you, and one \
             of our verified professionals will assist you!"
        }
        Intent::General => {
            "Welcome to Servecure! We're a trusted platform connecting you with verified \
             home service professionals.\n\n\
             Here's how it works:\n\
             1. Search for the service you need\n\
             2. Choose from verified professionals\n\
             3. Book your preferred time slot\n\
             4. Get quality service at your doorstep\n\n\
             All our service providers are verified and covered by quality assurance. \
             Feel free to explore the website or contact our support team for more."
        }
    }
}

/// Fixed follow-up action labels per intent.
pub fn suggested_actions(intent: Intent) -> Vec<String> {
    let actions: &[&str] = match intent {
        Intent::Careers => &[
            "Browse all job openings",
            "Filter jobs by department",
            "View job requirements",
            "Contact HR team",
        ],
        Intent::Services => &[
            "Book a service",
            "View service pricing",
            "Check service areas",
            "Contact support",
        ],
        Intent::General => &[
            "Learn how it works",
            "Browse services",
            "View careers",
            "Contact support",
        ],
    };
    actions.iter().map(|a| a.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_intent_has_nonempty_templates() {
        for intent in Intent::ALL {
            assert!(!system_prompt(intent).is_empty());
            assert!(!fallback_response(intent).is_empty());
            assert!(!suggested_actions(intent).is_empty());
        }
    }

    #[test]
    fn test_fallbacks_read_as_answers_not_errors() {
        for intent in Intent::ALL {
            let text = fallback_response(intent).to_lowercase();
            assert!(!text.contains("error"));
            assert!(!text.contains("unavailable"));
        }
    }

    #[test]
    fn test_action_labels() {
        assert!(suggested_actions(Intent::Services).contains(&"Book a service".to_string()));
        assert!(
            suggested_actions(Intent::Careers).contains(&"Browse all job openings".to_string())
        );
    }
}
